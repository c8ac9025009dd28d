mod layout;
mod sidebar;
mod theme;
mod theme_lab;
mod toast;

pub use layout::LayoutState;
pub use sidebar::{render as render_sidebar, render_theme_modal};
pub use theme::{apply_theme, ThemeContext};
pub use theme_lab::{copy_theme_text, ThemeLabAction, ThemeLabState};
pub use toast::ToastBar;
