//! Statistics reporting.

use console::style;

use crate::download::DownloadState;

/// Print statistics for an album download.
pub fn print_download_stats(state: &DownloadState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!(
        "{}",
        style(format!("Statistics for {}:", state.album_name)).bold()
    );
    println!("  Directory: {}", state.output_dir.display());
    println!("  Pictures:  {}", state.pic_count);
    println!("  Videos:    {}", state.vid_count);
    println!("  Size:      {}", format_bytes(state.bytes_written));
    if state.failed_count() > 0 {
        println!("  Failed:    {}", style(state.failed_count()).red());
        for failure in &state.failures {
            println!(
                "    {} {}",
                style(&failure.photo_guid).dim(),
                failure.reason
            );
        }
    }
    println!(
        "  Total:     {}/{} downloaded",
        state.total_downloaded(),
        state.total_photos
    );
    println!("{}", style("═".repeat(50)).dim());
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
