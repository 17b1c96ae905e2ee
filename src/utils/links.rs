const FIGMA_HOSTS: [&str; 2] = ["figma.com", "www.figma.com"];
const FIGMA_KINDS: [&str; 3] = ["file", "proto", "design"];

/// Accepts `https://[www.]figma.com/{file|proto|design}/<key>` with an
/// alphanumeric key, followed by anything.
pub fn is_figma_url(url: &str) -> bool {
    let Some(rest) = url.strip_prefix("https://") else {
        return false;
    };

    let mut parts = rest.splitn(3, '/');
    let (Some(host), Some(kind), Some(tail)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    FIGMA_HOSTS.contains(&host)
        && FIGMA_KINDS.contains(&kind)
        && tail.starts_with(|c: char| c.is_ascii_alphanumeric())
}
