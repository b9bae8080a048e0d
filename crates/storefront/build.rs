//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so pages can link a cache-busting copy.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    fingerprint_css(Path::new(&manifest_dir));
}

/// Copy `static/css/main.css` to `static/css/derived/main.{hash}.css` and
/// expose the hash as `CSS_HASH`. An empty hash means "use main.css as is".
fn fingerprint_css(manifest_dir: &Path) {
    let css_path = manifest_dir.join("static/css/main.css");
    println!("cargo:rerun-if-changed={}", css_path.display());

    let Ok(content) = fs::read(&css_path) else {
        println!("cargo:warning=main.css not found; serving it without a hash");
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = digest.get(..8).unwrap_or(&digest);

    let derived_dir = manifest_dir.join("static/css/derived");
    let derived_path = derived_dir.join(format!("main.{hash}.css"));
    let copied = fs::create_dir_all(&derived_dir).and_then(|()| fs::copy(&css_path, &derived_path));

    match copied {
        Ok(_) => println!("cargo:rustc-env=CSS_HASH={hash}"),
        Err(e) => {
            println!("cargo:warning=Could not write {}: {e}", derived_path.display());
            println!("cargo:rustc-env=CSS_HASH=");
        }
    }
}
