// Run with: cargo fuzz run fuzz_newsletter_html
#![no_main]

use ghostcron::domain::NewsletterHtml;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(html) = NewsletterHtml::parse(data.to_string()) {
        let _ = html.image_sources();
    }
});
