//! HTML fixtures shaped like the listing site

use version_watcher::config::{FetchConfig, WatcherConfig};

/// A listing page; each entry is `(host, status text)`
pub fn listing_html(entries: &[(&str, &str)]) -> String {
    let servers: String = entries
        .iter()
        .map(|(host, status)| {
            format!(
                r#"
        <div class="server">
          <div class="info">
            <div class="name">{host}</div>
            <div class="ip">
              <div class="back-tooltip"><span>{host}</span></div>
            </div>
            <div class="block">{status}</div>
          </div>
        </div>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>Servers</title></head>
  <body>
    <div class="servers-list">{servers}
    </div>
  </body>
</html>"#
    )
}

/// A listing page that also carries a pagination control
pub fn pagination_html(labels: &[&str], entries: &[(&str, &str)]) -> String {
    let items: String = labels
        .iter()
        .map(|label| format!(r##"<li><a href="#">{}</a></li>"##, label))
        .collect();

    listing_html(entries).replace(
        "<body>",
        &format!(r#"<body><ul class="pagination">{}</ul>"#, items),
    )
}

/// Config pointing at a mock server, without retries
pub fn test_config(base_url: &str) -> WatcherConfig {
    WatcherConfig {
        base_url: base_url.to_string(),
        fetch: FetchConfig {
            timeout: 5_000,
            retries: 0,
            ..FetchConfig::default()
        },
        ..WatcherConfig::default()
    }
}
