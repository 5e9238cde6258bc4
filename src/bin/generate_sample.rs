use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a synthetic RMSD `.dat` file to try rmsd-plot on.
#[derive(Parser)]
struct Args {
    /// Output path.
    #[arg(default_value = "sample_rmsd.dat")]
    output: PathBuf,

    /// Number of frames.
    #[arg(short, long, default_value_t = 2000)]
    frames: u32,

    /// Every n-th frame is written as `NA`. 0 disables missing values.
    #[arg(long, default_value_t = 97)]
    missing_every: u32,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Relaxation toward an equilibrium RMSD: fast rise, then a plateau.
fn relaxation(frame: f64, plateau: f64, tau: f64) -> f64 {
    plateau * (1.0 - (-frame / tau).exp())
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);

    // Slow drift on top of the relaxation, like a domain slowly rearranging.
    let mut drift = 0.0;
    let mut missing = 0;
    for frame in 0..args.frames {
        drift = (drift + rng.gauss(0.0, 0.004)).clamp(-0.3, 0.3);
        if args.missing_every > 0 && frame > 0 && frame % args.missing_every == 0 {
            writeln!(writer, "{frame}\tNA")?;
            missing += 1;
            continue;
        }
        let rmsd = (relaxation(f64::from(frame), 2.4, 150.0) + drift + rng.gauss(0.0, 0.08)).max(0.0);
        writeln!(writer, "{frame}\t{rmsd:.4}")?;
    }
    writer.flush()?;

    println!(
        "Wrote {} frames ({missing} missing) to {}",
        args.frames,
        args.output.display()
    );
    Ok(())
}
