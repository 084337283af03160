use incline_telemetry::{
    CalibrationProfile, CalibrationStep, Inclination, OperatorPrompt, PhysicalSample,
    SensorStatus, TelemetrySink,
};
use std::io::{self, BufRead, Write};

/// Prints each processed frame on stdout, in the layout of the original
/// board console.
pub struct ConsoleDisplay;

impl TelemetrySink for ConsoleDisplay {
    fn on_profile(&mut self, profile: &CalibrationProfile) {
        println!("Calibration offsets: {:?}", profile.offsets());
        println!("Calibration scales:  {:?}", profile.scales());
        println!();
    }

    fn on_sample(
        &mut self,
        status: SensorStatus,
        sample: &PhysicalSample,
        inclination: Inclination,
    ) {
        println!("Timestamp (s) {:.3}", sample.timestamp_s());

        if status.adxl_online {
            let a = sample.adxl_accel();
            println!("ADXL345 online");
            println!("\tAcceleration (g) x:{:.2}, y:{:.2}, z:{:.2}", a.x, a.y, a.z);
        } else {
            println!("ADXL345 offline");
        }

        if status.mpu_online {
            let a = sample.mpu_accel();
            let g = sample.mpu_gyro();
            println!("MPU6050 online");
            println!("\tAcceleration (g) x:{:.2}, y:{:.2}, z:{:.2}", a.x, a.y, a.z);
            println!("\tRotation (°/s) x:{:.2}, y:{:.2}, z:{:.2}", g.x, g.y, g.z);
            println!("\tTemperature (°C) {:.2}", sample.mpu_temp_c());
        } else {
            println!("MPU6050 offline");
        }

        println!("Inclination");
        println!("\tTheta: {:.2}, Phi: {:.2}", inclination.theta, inclination.phi);
        println!();
    }
}

/// Blocks on stdin for calibration phase confirmations.
pub struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn confirm(&mut self, step: CalibrationStep) -> io::Result<()> {
        match step {
            CalibrationStep::HoldStill => {
                print!("Hold the board still, then press Enter: ");
            }
            CalibrationStep::Orient { axis, facing } => {
                print!(
                    "Point the {} axis {}, then press Enter: ",
                    axis.label(),
                    facing.label()
                );
            }
        }
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}
