use serde::Serialize;
use std::fmt;

/// The ten logical views of the site.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Page {
    #[default]
    Home,
    About,
    Features,
    Privacy,
    Terms,
    Contact,
    Testimonials,
    CookiePolicy,
    Disclaimer,
    HowItWorks,
}

impl Page {
    pub const ALL: [Page; 10] = [
        Page::Home,
        Page::About,
        Page::Features,
        Page::Privacy,
        Page::Terms,
        Page::Contact,
        Page::Testimonials,
        Page::CookiePolicy,
        Page::Disclaimer,
        Page::HowItWorks,
    ];

    /// Resolves a request path to a page. Unknown paths resolve to [`Page::Home`].
    pub fn from_path(path: &str) -> Self {
        match path {
            "/about" => Page::About,
            "/features" => Page::Features,
            "/privacy" => Page::Privacy,
            "/terms" => Page::Terms,
            "/contact" => Page::Contact,
            "/testimonials" => Page::Testimonials,
            "/cookie-policy" => Page::CookiePolicy,
            "/disclaimer" => Page::Disclaimer,
            "/how-it-works" => Page::HowItWorks,
            _ => Page::Home,
        }
    }

    /// Canonical path for the page.
    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::About => "/about",
            Page::Features => "/features",
            Page::Privacy => "/privacy",
            Page::Terms => "/terms",
            Page::Contact => "/contact",
            Page::Testimonials => "/testimonials",
            Page::CookiePolicy => "/cookie-policy",
            Page::Disclaimer => "/disclaimer",
            Page::HowItWorks => "/how-it-works",
        }
    }

    /// Heading shown at the top of the page body.
    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Clarity for your Skin Journey",
            Page::About => "About Us",
            Page::Features => "Features",
            Page::Privacy => "Privacy Policy",
            Page::Terms => "Terms of Service",
            Page::Contact => "Contact Us",
            Page::Testimonials => "What Our Users Say",
            Page::CookiePolicy => "Cookie Policy",
            Page::Disclaimer => "Medical Disclaimer",
            Page::HowItWorks => "How It Works",
        }
    }

    pub fn nav_label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
            Page::Features => "Features",
            Page::Privacy => "Privacy Policy",
            Page::Terms => "Terms of Service",
            Page::Contact => "Contact",
            Page::Testimonials => "Testimonials",
            Page::CookiePolicy => "Cookie Policy",
            Page::Disclaimer => "Disclaimer",
            Page::HowItWorks => "How it works",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nav_label())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScrollTarget {
    Top,
    Analyzer,
}

/// Result of navigating to a page: where the browser ends up and what it scrolls to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Navigation {
    pub page: Page,
    pub path: &'static str,
    pub scroll: ScrollTarget,
}

impl Navigation {
    /// The "start check-in" action: the home page, scrolled to the analyzer form.
    pub fn to_analyzer() -> Self {
        Self {
            page: Page::Home,
            path: Page::Home.path(),
            scroll: ScrollTarget::Analyzer,
        }
    }

    /// Link target including the fragment for the scroll position.
    pub fn href(&self) -> String {
        match self.scroll {
            ScrollTarget::Top => self.path.to_string(),
            ScrollTarget::Analyzer => format!("{}#analyzer", self.path),
        }
    }
}

/// Navigates to `page`, landing at the top of it.
pub fn navigate(page: Page) -> Navigation {
    Navigation {
        page,
        path: page.path(),
        scroll: ScrollTarget::Top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_page_round_trips_through_its_path() {
        for page in Page::ALL {
            assert_eq!(Page::from_path(page.path()), page, "{page:?}");
        }
    }

    #[test]
    fn paths_are_distinct() {
        let mut paths: Vec<_> = Page::ALL.iter().map(|page| page.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Page::ALL.len());
    }

    #[test]
    fn unknown_paths_resolve_home() {
        for path in ["", "/nope", "/about/", "/ABOUT", "/terms?x=1", "//"] {
            assert_eq!(Page::from_path(path), Page::Home, "{path}");
        }
    }

    #[test]
    fn navigate_lands_at_top_of_page() {
        let nav = navigate(Page::CookiePolicy);
        assert_eq!(nav.page, Page::CookiePolicy);
        assert_eq!(nav.path, "/cookie-policy");
        assert_eq!(nav.scroll, ScrollTarget::Top);
        assert_eq!(nav.href(), "/cookie-policy");
    }

    #[test]
    fn analyzer_navigation_targets_home_fragment() {
        let nav = Navigation::to_analyzer();
        assert_eq!(nav.page, Page::Home);
        assert_eq!(nav.href(), "/#analyzer");
    }
}
