use std::io::{self, Write};

/// Writes a hex dump of `data` to `output`. The `initial_offset` is the
/// offset printed for the first byte of `data`.
///
/// Lines are aligned to 16-byte boundaries of the printed offset, and a
/// column header is repeated every 16 lines:
///
/// ```text
///     -----------------------------------------------
///     00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F
///     -----------------------------------------------
/// 00: 6C 75 72 65 00 00 03 40 00 00 00 FF 00 00 00 00 lure...@........
/// ```
pub fn hex_dump_to<W: Write>(mut output: W, data: &[u8], initial_offset: usize) -> io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    let max_offset = initial_offset + data.len() - 1;
    let offset_width = format!("{max_offset:X}").len().max(2);
    let offset_padding = " ".repeat(offset_width);

    let mut remaining = data;
    let mut curr_offset = initial_offset;
    let mut num_lines = 0usize;
    while !remaining.is_empty() {
        if num_lines % 16 == 0 {
            writeln!(
                output,
                "{offset_padding}  -----------------------------------------------"
            )?;
            writeln!(
                output,
                "{offset_padding}  00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F"
            )?;
            writeln!(
                output,
                "{offset_padding}  -----------------------------------------------"
            )?;
        }
        let line_start = curr_offset % 16;
        let line_len = remaining.len().min(16 - line_start);
        let line_end = line_start + line_len;
        let (line, rest) = remaining.split_at(line_len);

        write!(output, "{curr_offset:0offset_width$X}: ")?;
        write!(output, "{}", "   ".repeat(line_start))?;
        for byte in line {
            write!(output, "{byte:02X} ")?;
        }
        write!(output, "{}", "   ".repeat(16 - line_end))?;
        let ascii: String = line
            .iter()
            .map(|&b| if (32..=126).contains(&b) { char::from(b) } else { '.' })
            .collect();
        writeln!(
            output,
            "{}{ascii}{}",
            " ".repeat(line_start),
            " ".repeat(16 - line_end)
        )?;

        remaining = rest;
        curr_offset += line_len;
        num_lines += 1;
    }
    Ok(())
}
