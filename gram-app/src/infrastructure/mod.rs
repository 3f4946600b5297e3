pub mod logging;
pub mod session_file;
pub mod settings;

pub use logging::init_logging;
pub use settings::Settings;
