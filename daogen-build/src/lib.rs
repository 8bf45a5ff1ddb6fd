//! Build-time DAO generation for daogen entities.
//!
//! Runs the same pipeline as `daogen generate` from a `build.rs` script and
//! rewrites a module only when its content changed.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     daogen_build::generate_dao()
//!         .search_root("src/")
//!         .output_dir("src/dao")
//!         .entity("Person", "people")
//!         .mod_file(true)
//!         .run()
//!         .expect("Failed to generate DAOs");
//!
//!     println!("cargo:rerun-if-changed=src/dto");
//! }
//! ```

mod generator;

pub use generator::DaoGenerator;

/// Create a new DAO generator with default settings.
pub fn generate_dao() -> DaoGenerator {
    DaoGenerator::new()
}
