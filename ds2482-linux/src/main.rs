use clap::Parser;
use ds2482::{DeviceConfiguration, Ds2482, Ds2482Builder, OneWire};
use embedded_onewire::{OneWireSearch, OneWireSearchKind};
use linux_embedded_hal::I2cdev;

/// List the 1-Wire devices behind a DS2482 bridge
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// I2C address of the DS2482, decimal or 0x-prefixed hex
    #[arg(short, long, default_value = "0x18", value_parser = parse_address)]
    address: u8,
    /// Number of status polls before a 1-Wire operation times out
    #[arg(short, long, default_value_t = 100)]
    retries: u8,
    /// Drive the bus with the active pullup
    #[arg(long)]
    active_pullup: bool,
    /// Enable the strong pullup after the next bit or byte
    #[arg(long)]
    strong_pullup: bool,
    /// Only list devices reporting an alarm
    #[arg(long)]
    alarmed: bool,
    /// Check whether the device with this ROM code (hex) is on the bus
    #[arg(long, value_parser = parse_rom)]
    verify: Option<u64>,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let addr = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    addr.map_err(|e| format!("invalid I2C address {s}: {e}"))
}

fn parse_rom(s: &str) -> Result<u64, String> {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(hex, 16).map_err(|e| format!("invalid ROM code {s}: {e}"))
}

/// Open the I2C bus at `path` and reset the bridge at `address`.
fn open(args: &Args) -> Ds2482<I2cdev> {
    let i2c = I2cdev::new(&args.path).expect("Failed to open I2C device");
    Ds2482Builder::default()
        .with_address(args.address)
        .with_retries(args.retries)
        .with_config(
            DeviceConfiguration::new()
                .with_active_pullup(args.active_pullup)
                .with_strong_pullup(args.strong_pullup),
        )
        .build(i2c)
        .expect("Failed to create DS2482 instance")
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    let mut ds2482 = open(&args);

    if let Some(rom) = args.verify {
        let present = OneWireSearch::new(&mut ds2482, OneWireSearchKind::Normal)
            .verify(rom)
            .expect("Failed to verify device");
        log::info!("ROM: {:016x} present: {}", rom, present);
    } else if args.alarmed {
        let mut search = OneWireSearch::new(&mut ds2482, OneWireSearchKind::Alarmed);
        while let Some(rom) = search.next().expect("Failed to search for alarmed devices") {
            log::info!("ROM: {:016x} (family {:02x}) alarmed", rom, rom as u8);
        }
    } else {
        let devices = ds2482
            .find_devices::<64>()
            .expect("Failed to enumerate devices");
        log::info!("Found {} devices", devices.len());
        for rom in devices {
            log::info!("ROM: {:016x} (family {:02x})", rom, rom as u8);
        }
    }

    ds2482.close();
}
