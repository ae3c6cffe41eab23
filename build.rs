use std::{
    env,
    fs::File,
    io::{self, prelude::*},
    path::PathBuf,
};

fn main() -> Result<(), Error> {
    // Host builds (tests, docs) do not link against a memory map.
    if let Some(target) = Target::read() {
        copy_memory_config(target)?;
    } else if cfg!(feature = "rt") {
        error("You must select a target.
If you're building the firmware, select a target by enabling the respective device feature, for example `--features=stm32f103xb,rt`.
Please refer to the README for the list of supported devices."
        );
    }

    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}

/// Make `memory.x` available to the linker
fn copy_memory_config(target: Target) -> Result<(), Error> {
    let memory_x = match target.sub_family {
        SubFamily::Stm32f100xb => include_bytes!("memory_128_8.x").as_ref(),
        SubFamily::Stm32f101xb => include_bytes!("memory_128_16.x").as_ref(),
        SubFamily::Stm32f103x8 => include_bytes!("memory_64_20.x").as_ref(),
        SubFamily::Stm32f103xb => include_bytes!("memory_128_20.x").as_ref(),
    };

    let out_dir = env::var("OUT_DIR")?;
    let out_dir = PathBuf::from(out_dir);

    File::create(out_dir.join("memory.x"))?.write_all(memory_x)?;

    // Tell Cargo where to find the file.
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory_128_8.x");
    println!("cargo:rerun-if-changed=memory_128_16.x");
    println!("cargo:rerun-if-changed=memory_64_20.x");
    println!("cargo:rerun-if-changed=memory_128_20.x");

    Ok(())
}

#[derive(Clone, Copy)]
struct Target {
    sub_family: SubFamily,
}

impl Target {
    fn read() -> Option<Self> {
        let sub_family = SubFamily::read()?;

        Some(Self { sub_family })
    }
}

#[derive(Clone, Copy)]
enum SubFamily {
    Stm32f100xb,
    Stm32f101xb,
    Stm32f103x8,
    Stm32f103xb,
}

impl SubFamily {
    fn read() -> Option<Self> {
        if cfg!(feature = "stm32f100xb") {
            Some(SubFamily::Stm32f100xb)
        } else if cfg!(feature = "stm32f101xb") {
            Some(SubFamily::Stm32f101xb)
        } else if cfg!(feature = "stm32f103x8") {
            Some(SubFamily::Stm32f103x8)
        } else if cfg!(feature = "stm32f103xb") {
            Some(SubFamily::Stm32f103xb)
        } else {
            None
        }
    }
}

#[derive(Debug)]
enum Error {
    Env(env::VarError),
    Io(io::Error),
}

impl From<env::VarError> for Error {
    fn from(error: env::VarError) -> Self {
        Self::Env(error)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

fn error(message: &str) -> ! {
    panic!("\n\n\n{}\n\n\n", message);
}
