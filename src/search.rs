use std::process::{Command, Stdio};

use url::form_urlencoded;

const SEARCH_URL: &str = "https://www.google.com/search";

/// Web search on a free-text query.
pub fn web_search_url(query: &str) -> String {
    format!("{SEARCH_URL}?q={}", escape(query))
}

/// Image search on a query term.
pub fn image_search_url(query: &str) -> String {
    format!("{SEARCH_URL}?tbm=isch&q={}", escape(query))
}

fn escape(query: &str) -> String {
    form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

/// Opens URLs in a new browser tab.
pub trait Navigator {
    fn open(&mut self, url: &str);
}

/// Opens URLs with the desktop's default handler.
/// Uses `open` on macOS, `xdg-open` elsewhere.
#[derive(Debug, Default)]
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn open(&mut self, url: &str) {
        #[cfg(target_os = "macos")]
        let cmd = "open";
        #[cfg(not(target_os = "macos"))]
        let cmd = "xdg-open";

        // Not waited on: the browser may outlive us.
        let spawned = Command::new(cmd)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => log::info!("Opened {url}"),
            Err(e) => log::warn!("Failed to spawn {cmd} for {url}: {e}"),
        }
    }
}
