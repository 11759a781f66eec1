//! Terminal utility functions

use std::io::{self, BufRead, Write};

/// Print `label` and read one trimmed line of input.
///
/// Returns an empty string on end of input.
pub fn prompt_line<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    label: &str,
) -> io::Result<String> {
    write!(writer, "{}: ", label)?;
    writer.flush()?;

    let mut input = String::new();
    reader.read_line(&mut input)?;
    Ok(input.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_line_reads_trimmed_input() {
        let mut input = io::Cursor::new("  cmp_123 \n");
        let mut output = Vec::new();
        let value = prompt_line(&mut input, &mut output, "CompanyID (grp_/cmp_)").unwrap();

        assert_eq!(value, "cmp_123");
        assert_eq!(String::from_utf8(output).unwrap(), "CompanyID (grp_/cmp_): ");
    }

    #[test]
    fn test_prompt_line_end_of_input() {
        let mut input = io::Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(prompt_line(&mut input, &mut output, "URL").unwrap(), "");
    }
}
