use scicalc::{AngleMode, Builtins};
use std::io::{BufRead, BufReader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut ctx = Builtins::default();
    let stdin = std::io::stdin();

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;
        let line = line.trim();

        match line {
            "" => continue,
            ":deg" => ctx = ctx.with_angle_mode(AngleMode::Degrees),
            ":rad" => ctx = ctx.with_angle_mode(AngleMode::Radians),
            ":inv" => {
                ctx = ctx.inverted(!ctx.inverse);
                println!("Inverse mode {}", if ctx.inverse { "on" } else { "off" });
            },
            _ => match scicalc::solve(line, &ctx) {
                Ok(solution) => println!("{}", solution),
                Err(e) => eprintln!("Unable to calculate \"{}\": {}", line, e),
            },
        }
    }

    Ok(())
}
