pub mod loader {
    pub use netimage_loader::*;
}
pub mod view {
    pub use netimage_view::*;
}
