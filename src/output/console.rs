//! Console output utilities.

use console::style;

use crate::api::types::{Album, Photo};
use crate::media::select_best_derivative;

/// Number of photos listed by the album summary.
pub const SUMMARY_PHOTO_LIMIT: usize = 5;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print any warnings attached to a fetched album.
pub fn print_album_warnings(album: &Album) {
    for warning in &album.warnings {
        print_warning(&warning.to_string());
    }
}

fn print_album_header(album: &Album) {
    let metadata = &album.metadata;
    let owner = metadata.owner();

    println!();
    println!("{}", style(&metadata.stream_name).bold());
    if !owner.is_empty() {
        println!("  Owner:  {}", owner);
    }
    println!("  Photos: {}", album.photos.len());
}

fn photo_date(photo: &Photo) -> String {
    match photo.created_at() {
        Some(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        None => photo
            .date_created
            .clone()
            .unwrap_or_else(|| "unknown date".to_string()),
    }
}

/// Print album name, owner, photo count and the first few photos.
pub fn print_album_summary(album: &Album) {
    print_album_header(album);

    if album.photos.is_empty() {
        return;
    }

    println!();
    for (i, photo) in album.photos.iter().take(SUMMARY_PHOTO_LIMIT).enumerate() {
        let caption = photo.caption_text().unwrap_or("");
        println!(
            "  {:>3}. {}  {}",
            i + 1,
            style(photo_date(photo)).dim(),
            caption
        );
    }

    let remaining = album.photos.len().saturating_sub(SUMMARY_PHOTO_LIMIT);
    if remaining > 0 {
        println!("  {}", style(format!("... and {} more", remaining)).dim());
    }
}

/// Print every photo with all derivatives and their URLs.
pub fn print_album_details(album: &Album) {
    print_album_header(album);

    for (i, photo) in album.photos.iter().enumerate() {
        let best = select_best_derivative(&photo.derivatives).map(|s| s.key);

        println!();
        println!(
            "{} {}  {}",
            style(format!("#{}", i + 1)).bold(),
            photo.photo_guid,
            style(photo_date(photo)).dim()
        );
        if let Some(caption) = photo.caption_text() {
            println!("    Caption: {}", caption);
        }

        for (key, derivative) in &photo.derivatives {
            let dimensions = match (derivative.width, derivative.height) {
                (Some(w), Some(h)) => format!("{}x{}", w, h),
                _ => "?x?".to_string(),
            };
            let marker = if best == Some(key.as_str()) { "*" } else { " " };
            let url = derivative.url.as_deref().unwrap_or("(no URL)");
            println!(
                "   {} {:<12} {:>11}  {}",
                style(marker).green().bold(),
                key,
                dimensions,
                url
            );
        }
    }
}
