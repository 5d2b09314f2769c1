//! Minimal GPU info CLI tool

use std::process;

use radeon_adl::AdlError;

fn main() {
    match radeon_adl::get_gpu_info() {
        Ok(gpus) => {
            for gpu in gpus {
                // One line per GPU
                print!("{} {}", gpu.vendor, gpu.name);

                if let Some(memory) = &gpu.memory {
                    print!(" ({} MiB {})", memory.size_bytes / (1024 * 1024), memory.memory_type);
                }

                if let Some(driver) = &gpu.driver_version {
                    print!(" [{}]", driver);
                }

                println!();
            }
            process::exit(0);
        }
        Err(AdlError::LibraryNotFound { .. }) | Err(AdlError::NoAdapter) => {
            eprintln!("no_gpu");
            process::exit(1);
        }
        Err(AdlError::SymbolNotFound(_)) => {
            eprintln!("unsupported_driver");
            process::exit(2);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(3);
        }
    }
}
