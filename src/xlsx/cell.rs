//! A1-style cell references.

/// Convert a 1-based column number to letters (1 → `A`, 27 → `AA`).
pub fn column_to_letters(col: u32) -> String {
    let mut letters = Vec::new();
    let mut col = col;

    while col > 0 {
        col -= 1;
        letters.push((col % 26) as u8 + b'A');
        col /= 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Build an A1-style reference from 1-based coordinates.
pub fn coords_to_reference(row: u32, col: u32) -> String {
    let mut reference = column_to_letters(col);
    reference.push_str(itoa::Buffer::new().format(row));
    reference
}

/// Split an A1-style reference into 1-based `(row, column)`.
///
/// `$` anchors are ignored. Returns `None` for anything that is not a
/// column followed by a row number.
pub fn reference_to_coords(reference: &str) -> Option<(u32, u32)> {
    let bytes: Vec<u8> = reference.bytes().filter(|&b| b != b'$').collect();
    let letters = bytes.iter().take_while(|b| b.is_ascii_alphabetic()).count();
    if letters == 0 || letters > 3 || letters == bytes.len() {
        return None;
    }

    let mut col = 0u32;
    for b in &bytes[..letters] {
        col = col * 26 + u32::from(b.to_ascii_uppercase() - b'A' + 1);
    }
    let row = atoi_simd::parse_pos::<u32, false>(&bytes[letters..]).ok()?;
    if row == 0 {
        return None;
    }
    Some((row, col))
}
