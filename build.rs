use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET", "PKG_CONFIG_PATH"];

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    // An explicit FFmpeg location always wins; ffmpeg-sys-next reads it.
    if let Some(directory) = env::var_os("FFMPEG_DIR") {
        let directory = PathBuf::from(directory);
        if !directory.join("include").exists() {
            warn(&format!(
                "FFMPEG_DIR={} has no include/ directory; ffmpeg-sys-next will fail to find headers.",
                directory.display()
            ));
        }
        return;
    }

    match env::var("CARGO_CFG_TARGET_OS").unwrap_or_default().as_str() {
        "windows" => hint_vcpkg(),
        _ => hint_pkg_config(),
    }
}

fn warn(message: &str) {
    println!("cargo:warning={message}");
}

fn hint_vcpkg() {
    let Ok(root) = env::var("VCPKG_ROOT") else {
        warn("Neither FFMPEG_DIR nor VCPKG_ROOT is set. Install FFmpeg via vcpkg and point FFMPEG_DIR at it.");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let installed = Path::new(&root).join("installed").join(&triplet);
    if installed.exists() {
        warn(&format!(
            "Found vcpkg FFmpeg at {}. Set FFMPEG_DIR to it to make discovery explicit.",
            installed.display()
        ));
    } else {
        warn(&format!(
            "VCPKG_ROOT is set but {} does not exist.",
            installed.display()
        ));
    }
}

fn hint_pkg_config() {
    let search_path = env::var("PKG_CONFIG_PATH").unwrap_or_default();
    let has_libavformat = env::split_paths(&search_path)
        .any(|directory| directory.join("libavformat.pc").exists());

    if !search_path.is_empty() && !has_libavformat {
        warn("PKG_CONFIG_PATH is set but contains no libavformat.pc; relying on system pkg-config defaults.");
    }
}
