//! Page surfaces - the renderable for one carousel page

use std::fmt;
use std::rc::Rc;

/// How an image is fitted into the page bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleType {
    /// Stretch to fill both axes
    #[default]
    FitXy,
    /// Center without scaling
    Center,
    /// Scale uniformly and crop the overflow
    CenterCrop,
}

/// What a surface currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceContent {
    /// Nothing has been loaded yet
    #[default]
    Placeholder,
    /// An image was loaded from this URL
    Image(String),
}

/// Click handler attached to a surface
pub type ClickHandler = Rc<dyn Fn()>;

/// The on-screen surface representing one carousel page
///
/// Surfaces are owned by a [`PageContainer`](crate::PageContainer); the
/// paging adapter and its cache only ever hold their [`PageId`](crate::PageId).
#[derive(Default)]
pub struct PageSurface {
    content: SurfaceContent,
    scale_type: ScaleType,
    on_click: Option<ClickHandler>,
    loads: u32,
}

impl PageSurface {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an image loaded from `url`
    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.content = SurfaceContent::Image(url.into());
        self.loads += 1;
    }

    /// Current content
    pub fn content(&self) -> &SurfaceContent {
        &self.content
    }

    /// URL of the loaded image, if any
    pub fn image_url(&self) -> Option<&str> {
        match &self.content {
            SurfaceContent::Image(url) => Some(url),
            SurfaceContent::Placeholder => None,
        }
    }

    /// How many times an image was loaded into this surface
    pub fn load_count(&self) -> u32 {
        self.loads
    }

    /// Fit mode
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Set the fit mode
    pub fn set_scale_type(&mut self, scale_type: ScaleType) {
        self.scale_type = scale_type;
    }

    /// Attach (or clear) the click handler
    pub fn set_on_click<F>(&mut self, handler: Option<F>)
    where
        F: Fn() + 'static,
    {
        self.on_click = handler.map(|h| Rc::new(h) as ClickHandler);
    }

    /// The click handler, cloned so it can run after the surface is released
    pub fn click_handler(&self) -> Option<ClickHandler> {
        self.on_click.clone()
    }

    /// Whether a click handler is attached
    pub fn is_clickable(&self) -> bool {
        self.on_click.is_some()
    }
}

impl fmt::Debug for PageSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSurface")
            .field("content", &self.content)
            .field("scale_type", &self.scale_type)
            .field("clickable", &self.on_click.is_some())
            .field("loads", &self.loads)
            .finish()
    }
}
