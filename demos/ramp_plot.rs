use std::error::Error;

use gnuplot::*;
use linspeed_ramp::{
    Acceleration, LinSpeedRamp, RampCommand, RampCommandQueue, RampExecutor, UpdatePeriod,
};

fn main() -> Result<(), Box<dyn Error>> {
    // -----------------------
    // 1. Set up parameters
    // -----------------------
    let target_speed = 4000; // steps/s
    let acceleration = Acceleration::per_sec2(8000.0)?; // steps/s²
    let update_period = UpdatePeriod::from_micros(1000)?; // 1 kHz update rate
    let rate_hz = 1e6 / update_period.as_micros() as f64;

    // -------------------------
    // 2. Create and configure
    // -------------------------
    let mut queue = RampCommandQueue::<4>::new();
    let (mut commands, receiver) = queue.split();
    let mut executor = RampExecutor::new(LinSpeedRamp::new(), receiver);
    commands.submit(RampCommand::prepare(target_speed, acceleration, update_period))?;

    // ---------------------------------------------------------
    // 3. Run: ramp up, slow to half speed, speed up, then stop
    // ---------------------------------------------------------
    let num_points = (2.5 * rate_hz) as usize;
    let mut time_axis = Vec::with_capacity(num_points);
    let mut speeds = Vec::with_capacity(num_points);

    for i in 0..num_points {
        match i {
            700 => commands.submit(RampCommand::OverrideSpeed(0.5))?,
            1200 => commands.submit(RampCommand::OverrideAcceleration(2.0))?,
            1300 => commands.submit(RampCommand::OverrideSpeed(1.0))?,
            1900 => commands.submit(RampCommand::Stop)?,
            _ => {}
        }
        time_axis.push(i as f64 / rate_hz);
        speeds.push(executor.tick(0) as f64);
    }

    if executor.speed() != 0 {
        eprintln!("Warning: ramp did not come to rest, final speed {}.", executor.speed());
    }

    // --------------
    // 4. Plot data
    // --------------
    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title("Linear speed ramp", &[]);
        axes.set_x_label("Time (s)", &[]);
        axes.set_y_label("Speed (steps/s)", &[]);
        axes.lines(&time_axis, &speeds, &[Color("red"), Caption("Speed")]);
    }

    // Attempt to show in a pop-up window (might require gnuplot installed)
    fg.show().map_err(|e| format!("Failed to display plot: {e}"))?;

    println!("Plot generated. {} updates at {:.0} Hz.", num_points, rate_hz);
    Ok(())
}
