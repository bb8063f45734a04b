#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod draw;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use draw::{Drawing, Primitive, draw, emit_primitives};
pub use ir::Document;
pub use layout::{EntityError, Layout, LayoutError, compute_layout};
pub use parser::{ParseOutput, parse_project};
pub use render::render_svg;
pub use theme::Theme;
