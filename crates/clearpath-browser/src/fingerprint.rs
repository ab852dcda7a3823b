use rand::seq::SliceRandom;
use rand::Rng;

const CHROME_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

// Registry portals lay out result tables for desktop widths only.
const DESKTOP_VIEWPORTS: &[(u32, u32)] = &[(1920, 1080), (1536, 864), (1440, 900), (1366, 768)];

/// Browser identity used for one pooled Chromium instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// User-Agent header and `navigator.userAgent`
    pub user_agent: String,
    /// Window width in pixels
    pub viewport_width: u32,
    /// Window height in pixels
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Choose an identity from the thread-local generator.
    pub fn randomized() -> Self {
        Self::pick(&mut rand::thread_rng())
    }

    /// Choose a desktop Chrome identity from the given generator.
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let user_agent = CHROME_USER_AGENTS
            .choose(rng)
            .copied()
            .unwrap_or(CHROME_USER_AGENTS[0]);
        let (viewport_width, viewport_height) = DESKTOP_VIEWPORTS
            .choose(rng)
            .copied()
            .unwrap_or(DESKTOP_VIEWPORTS[0]);

        Self {
            user_agent: user_agent.to_string(),
            viewport_width,
            viewport_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pick_is_desktop_chrome() {
        let config = FingerprintConfig::randomized();
        assert!(config.user_agent.contains("Chrome/"));
        assert!(config.viewport_width >= 1366);
    }

    #[test]
    fn test_pick_is_reproducible_with_seed() {
        let a = FingerprintConfig::pick(&mut StdRng::seed_from_u64(7));
        let b = FingerprintConfig::pick(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(DESKTOP_VIEWPORTS.contains(&(a.viewport_width, a.viewport_height)));
    }
}
