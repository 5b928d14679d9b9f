use std::env;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use linux_embedded_hal::{Delay, I2cdev};
use mlx90614::{Channel, Error, LibraryError, Mlx90614, DEFAULT_ADDRESS};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("Usage: temperatures <I2C bus> [sensor address]");
    }
    let address: u8 = match args.get(2) {
        Some(arg) if arg.starts_with("0x") => {
            let hex_digits = arg.split_at(2).1;
            u8::from_str_radix(hex_digits, 16)?
        }
        Some(arg) => arg.parse()?,
        None => DEFAULT_ADDRESS,
    };
    let bus_path = Path::new(&args[1]);
    let bus = I2cdev::new(bus_path)
        .with_context(|| format!("Unable to open I²C bus {}", bus_path.display()))?;
    let mut sensor = Mlx90614::new(bus, Delay, address)
        .map_err(|err| anyhow!("Unable to open sensor at {:#04X}: {}", address, err))?;
    println!("Sensor ID: {:04X?}", sensor.id());
    let delay = Duration::from_millis(500);
    loop {
        let object = describe(sensor.object_temperature(Channel::One));
        let ambient = describe(sensor.ambient_temperature());
        println!("Temperatures: To1 {}, Ta {}", object, ambient);
        sleep(delay);
    }
}

// Keep going if a single read fails, the next one will probably be fine.
fn describe(reading: Result<f32, Error<I2cdev>>) -> String {
    match reading {
        Ok(temperature) => format!("{:.2}", temperature),
        Err(Error::LibraryError(LibraryError::MeasurementError)) => "invalid".to_string(),
        Err(err) => format!("error ({})", err),
    }
}
