//! This is the main entry point for the disk analysis tool.
//!
//! The program provides an interactive command-line interface for analyzing
//! raw disk images: users can open an image, print its partition table and
//! detected volumes, inspect one volume, and quit.

use diskprobe::commands::Command;
use diskprobe::traits::LayoutDisplay;
use diskprobe::{register_builtin_detectors, DetectorRegistry, Disk};
use log::{error, warn};
use std::{
    io::{self, Write},
    path::Path,
};

/// Represents the runtime state of the program.
///
/// This struct keeps track of the currently opened disk image and the
/// detector registry built at startup.
struct RunState {
    /// The currently opened disk image.
    disk: Option<Disk>,
    /// The detector registry, populated once before the loop.
    registry: DetectorRegistry,
    /// The size of a sector
    sector_size: usize,
}

fn main() {
    stderrlog::new().module(module_path!()).init().unwrap();

    let mut registry = DetectorRegistry::new();
    register_builtin_detectors(&mut registry);

    let mut run_state = RunState {
        disk: None,
        registry,
        sector_size: 512,
    };

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut s = String::new();
        io::stdin()
            .read_line(&mut s)
            .expect("Failed to read command");
        let cmd = Command::from_string(&s);

        match cmd {
            Command::Open(path) => {
                match Disk::from_file(Path::new(&path), run_state.sector_size, &run_state.registry)
                {
                    Ok(disk) => {
                        run_state.disk = Some(disk);
                    }
                    Err(err) => {
                        error!("{err}");
                    }
                }
            }
            Command::Quit => break,
            Command::Print => match &run_state.disk {
                Some(disk) => disk.print_layout(0),
                None => warn!("Open disk image first"),
            },
            Command::Volume(vol_nb) => show_volume(&run_state, vol_nb),
            Command::Unknown(s) => error!("Unknown command: {s:?}"),
            Command::Invalid(s) => error!("{s}"),
            Command::Empty => {}
        }
    }
}

fn show_volume(run_state: &RunState, vol_nb: u8) {
    let Some(disk) = &run_state.disk else {
        warn!("Open disk image first");
        return;
    };

    if vol_nb < 1 || vol_nb as usize > disk.partitions().len() {
        error!(
            "Partition number for this disk should be between 1 and {}.",
            disk.partitions().len()
        );
        return;
    }

    match disk.volume_for(vol_nb as usize - 1) {
        Some(volume) => print!("{}", volume.display_layout(3)),
        None => warn!("No filesystem detected on partition {vol_nb}"),
    }
}
