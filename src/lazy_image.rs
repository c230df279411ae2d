//! Deferred image loading.
//!
//! Each rendered image owns a [`LazyImage`] that decides when its real
//! source is handed to the page:
//!
//! ```text
//!            priority
//!   new ─────────────────────▶ Loading ──load ok──▶ Loaded
//!    │                           ▲   └──load err──▶ Errored
//!    └──▶ Pending ──in range─────┘
//! ```
//!
//! - Priority (above-the-fold) images start in `Loading`.
//! - Other images wait in `Pending` behind a one-shot [`ViewportSubscription`]
//!   that fires once the image comes within the proximity margin of the
//!   viewport, then disarms.
//! - `Loaded` and `Errored` are terminal. An errored image shows
//!   [`FALLBACK_PLACEHOLDER`] and is never retried.
//! - [`LazyImage::destroy`] cancels the subscription; signals arriving after
//!   that are ignored.
//!
//! There is no load timeout: an image whose resource never settles stays in
//! `Loading`.

use serde::Serialize;

/// Distance from the viewport at which a pending image starts loading.
pub const DEFAULT_ROOT_MARGIN_PX: u32 = 50;

/// Inline "Image unavailable" graphic shown in place of a failed image.
pub const FALLBACK_PLACEHOLDER: &str = concat!(
    "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\" ",
    "viewBox=\"0 0 400 300\"%3E%3Crect fill=\"%23e2e8f0\" width=\"400\" height=\"300\"/%3E",
    "%3Ctext fill=\"%2394a3b8\" font-family=\"sans-serif\" font-size=\"14\" x=\"50%25\" y=\"50%25\" ",
    "text-anchor=\"middle\"%3EImage unavailable%3C/text%3E%3C/svg%3E"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Not yet eligible to load.
    Pending,
    /// Source assigned, resource not yet settled.
    Loading,
    Loaded,
    /// Load failed; fallback placeholder active.
    Errored,
}

impl LoadState {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Errored => "errored",
        }
    }
}

/// What to draw for an image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    pub src: String,
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Above-the-fold image; skips deferred loading.
    pub priority: bool,
}

impl ImageDescriptor {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            width: None,
            height: None,
            priority: false,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// CSS `aspect-ratio` value; 16/9 when dimensions are unknown.
    pub fn aspect_ratio(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => format!("{w}/{h}"),
            _ => "16/9".to_string(),
        }
    }
}

/// One-shot viewport-proximity observation tied to an image's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportSubscription {
    root_margin_px: u32,
    active: bool,
}

impl ViewportSubscription {
    pub fn new(root_margin_px: u32) -> Self {
        Self {
            root_margin_px,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn root_margin_px(&self) -> u32 {
        self.root_margin_px
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Feed an intersection report; returns true exactly once, the first time
    /// the image is within the margin while the subscription is armed.
    fn observe(&mut self, distance_px: u32) -> bool {
        if self.active && distance_px <= self.root_margin_px {
            self.active = false;
            return true;
        }
        false
    }
}

/// Load state machine for one image instance.
#[derive(Debug, Clone)]
pub struct LazyImage {
    descriptor: ImageDescriptor,
    state: LoadState,
    subscription: Option<ViewportSubscription>,
    destroyed: bool,
}

impl LazyImage {
    /// Create with the default 50px proximity margin.
    pub fn new(descriptor: ImageDescriptor) -> Self {
        Self::with_root_margin(descriptor, DEFAULT_ROOT_MARGIN_PX)
    }

    pub fn with_root_margin(descriptor: ImageDescriptor, root_margin_px: u32) -> Self {
        let (state, subscription) = if descriptor.priority {
            (LoadState::Loading, None)
        } else {
            (
                LoadState::Pending,
                Some(ViewportSubscription::new(root_margin_px)),
            )
        };
        Self {
            descriptor,
            state,
            subscription,
            destroyed: false,
        }
    }

    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn subscription(&self) -> Option<&ViewportSubscription> {
        self.subscription.as_ref()
    }

    pub fn is_in_viewport_or_priority(&self) -> bool {
        self.state != LoadState::Pending
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn has_error(&self) -> bool {
        self.state == LoadState::Errored
    }

    /// Intersection report: the image's bounding box is `distance_px` away
    /// from the viewport (0 = overlapping). Returns true if this moved the
    /// image from `Pending` to `Loading`.
    pub fn on_intersection(&mut self, distance_px: u32) -> bool {
        if self.destroyed || self.state != LoadState::Pending {
            return false;
        }
        let fired = self
            .subscription
            .as_mut()
            .is_some_and(|sub| sub.observe(distance_px));
        if fired {
            self.subscription = None;
            self.state = LoadState::Loading;
        }
        fired
    }

    /// Resource success signal.
    pub fn on_load(&mut self) -> bool {
        self.settle(LoadState::Loaded)
    }

    /// Resource failure signal.
    pub fn on_error(&mut self) -> bool {
        self.settle(LoadState::Errored)
    }

    fn settle(&mut self, outcome: LoadState) -> bool {
        if self.destroyed || self.state != LoadState::Loading {
            return false;
        }
        self.state = outcome;
        true
    }

    /// Tear down: cancel any pending observation and ignore later signals.
    pub fn destroy(&mut self) {
        if let Some(sub) = self.subscription.as_mut() {
            sub.cancel();
        }
        self.subscription = None;
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Source the renderer should assign: none while pending, the fallback
    /// after an error, the real source otherwise.
    pub fn current_src(&self) -> Option<&str> {
        match self.state {
            LoadState::Pending => None,
            LoadState::Loading | LoadState::Loaded => Some(&self.descriptor.src),
            LoadState::Errored => Some(FALLBACK_PLACEHOLDER),
        }
    }

    /// `loading` attribute for the `<img>` element.
    pub fn loading_attr(&self) -> &'static str {
        if self.descriptor.priority {
            "eager"
        } else {
            "lazy"
        }
    }

    /// `decoding` attribute for the `<img>` element.
    pub fn decoding_attr(&self) -> &'static str {
        if self.descriptor.priority {
            "sync"
        } else {
            "async"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> ImageDescriptor {
        ImageDescriptor::new("/img/hero.jpg", "Hero").with_size(1200, 600)
    }

    #[test]
    fn priority_image_starts_loading() {
        let img = LazyImage::new(hero().with_priority(true));
        assert_eq!(img.state(), LoadState::Loading);
        assert!(img.is_in_viewport_or_priority());
        assert!(img.subscription().is_none());
        assert_eq!(img.current_src(), Some("/img/hero.jpg"));
        assert_eq!(img.loading_attr(), "eager");
        assert_eq!(img.decoding_attr(), "sync");
    }

    #[test]
    fn deferred_image_starts_pending_with_armed_subscription() {
        let img = LazyImage::new(hero());
        assert_eq!(img.state(), LoadState::Pending);
        assert!(!img.is_in_viewport_or_priority());
        assert_eq!(img.current_src(), None);
        let sub = img.subscription().unwrap();
        assert!(sub.is_active());
        assert_eq!(sub.root_margin_px(), DEFAULT_ROOT_MARGIN_PX);
    }

    #[test]
    fn far_away_signal_does_not_trigger() {
        let mut img = LazyImage::new(hero());
        assert!(!img.on_intersection(51));
        assert_eq!(img.state(), LoadState::Pending);
        assert!(img.subscription().unwrap().is_active());
    }

    #[test]
    fn signal_within_margin_starts_loading_once() {
        let mut img = LazyImage::new(hero());
        assert!(img.on_intersection(50));
        assert_eq!(img.state(), LoadState::Loading);
        assert!(img.subscription().is_none());
        // Scroll away and back: no re-trigger
        assert!(!img.on_intersection(500));
        assert!(!img.on_intersection(0));
        assert_eq!(img.state(), LoadState::Loading);
    }

    #[test]
    fn custom_margin_is_respected() {
        let mut img = LazyImage::with_root_margin(hero(), 200);
        assert!(img.on_intersection(150));
    }

    #[test]
    fn load_success_is_terminal() {
        let mut img = LazyImage::new(hero().with_priority(true));
        assert!(img.on_load());
        assert!(img.is_loaded());
        assert!(!img.on_error());
        assert_eq!(img.state(), LoadState::Loaded);
    }

    #[test]
    fn load_error_exposes_fallback_not_source() {
        let mut img = LazyImage::new(hero().with_priority(true));
        assert!(img.on_error());
        assert!(img.has_error());
        assert_eq!(img.current_src(), Some(FALLBACK_PLACEHOLDER));
        assert_ne!(img.current_src(), Some("/img/hero.jpg"));
    }

    #[test]
    fn errored_image_is_never_retried() {
        let mut img = LazyImage::new(hero().with_priority(true));
        img.on_error();
        assert!(!img.on_load());
        assert!(!img.on_intersection(0));
        assert_eq!(img.state(), LoadState::Errored);
    }

    #[test]
    fn load_signals_ignored_while_pending() {
        let mut img = LazyImage::new(hero());
        assert!(!img.on_load());
        assert!(!img.on_error());
        assert_eq!(img.state(), LoadState::Pending);
    }

    #[test]
    fn destroy_before_trigger_cancels_observation() {
        let mut img = LazyImage::new(hero());
        img.destroy();
        assert!(img.is_destroyed());
        assert!(img.subscription().is_none());
        assert!(!img.on_intersection(0));
        assert_eq!(img.state(), LoadState::Pending);
    }

    #[test]
    fn destroy_while_loading_ignores_settlement() {
        let mut img = LazyImage::new(hero().with_priority(true));
        img.destroy();
        assert!(!img.on_load());
        assert_eq!(img.state(), LoadState::Loading);
    }

    #[test]
    fn aspect_ratio_from_dimensions() {
        assert_eq!(hero().aspect_ratio(), "1200/600");
        assert_eq!(ImageDescriptor::new("/a.jpg", "").aspect_ratio(), "16/9");
    }

    #[test]
    fn fallback_is_inline_svg() {
        assert!(FALLBACK_PLACEHOLDER.starts_with("data:image/svg+xml,"));
        assert!(FALLBACK_PLACEHOLDER.contains("Image unavailable"));
    }
}
