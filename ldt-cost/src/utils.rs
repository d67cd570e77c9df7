const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Render a size given in bits as bytes, using 1024-based units.
pub fn format_size(size_in_bits: usize) -> String {
    if size_in_bits == 0 {
        return "0B".to_string();
    }

    let size_in_bytes = size_in_bits as f64 / 8.0;
    let unit_index = (size_in_bytes.log2() / 10.0).floor().max(0.0) as usize;
    let unit_index = unit_index.min(SIZE_UNITS.len() - 1);
    let scaled = size_in_bytes / 1024_f64.powi(unit_index as i32);

    format!("{scaled:.2} {}", SIZE_UNITS[unit_index])
}

/// Size in bits, converted to whole KiB, rounded to nearest. Ties go to the
/// even neighbor.
pub fn bits_to_kib(size_in_bits: usize) -> usize {
    (size_in_bits as f64 / 8192.0).round_ties_even() as usize
}
