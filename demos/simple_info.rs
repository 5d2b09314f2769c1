//! Simple example showing basic GPU information retrieval

use radeon_adl::AdlError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("radeon-adl GPU Information Example");
    println!("==================================\n");

    match radeon_adl::get_gpu_info() {
        Ok(gpus) if gpus.is_empty() => {
            println!("No active AMD GPU found.");
        }
        Ok(gpus) => {
            for gpu in gpus {
                println!("GPU {}: {}", gpu.index, gpu.name);

                if let Some(version) = gpu.driver_version {
                    println!("  Driver Version: {}", version);
                }

                if let Some(memory) = gpu.memory {
                    println!("  Memory: {} MiB {}", memory.size_bytes / (1024 * 1024), memory.memory_type);
                }

                if let Some(clocks) = gpu.clocks {
                    println!("  Clocks: {} / {} MHz", clocks.core_mhz, clocks.memory_mhz);
                }

                for reading in gpu.sensors {
                    println!("  {}", reading);
                }
            }
        }
        Err(AdlError::LibraryNotFound { tried }) => {
            println!("AMD driver library not found (tried {}).", tried.join(", "));
            println!("   Set ADL_LIBRARY_PATH to point at it:");
            println!("   ADL_LIBRARY_PATH=/opt/amdgpu/lib/libatiadlxx.so cargo run --example simple_info");
        }
        Err(e) => {
            println!("Error: {}", e);
        }
    }

    Ok(())
}
