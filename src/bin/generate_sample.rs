//! Write a synthetic `bolton_risk_data.csv` so the dashboard can run without
//! the clustering notebook.

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Row {
    detid: String,
    lat: f64,
    long: f64,
    fclass: &'static str,
    avg_speed: f64,
    limit: u32,
    speed_gap: f64,
    avg_flow: f64,
    risk_label: &'static str,
}

/// Per-category speed behaviour: (label, speed offset from limit, spread, flow).
const PROFILES: [(&str, f64, f64, f64); 4] = [
    ("SAFE: Compliant & Stable", -3.0, 3.0, 700.0),
    ("LOW RISK: Congestion/Slow", -24.0, 6.0, 1100.0),
    ("MEDIUM RISK: Unstable Flow", -10.0, 9.0, 900.0),
    ("HIGH RISK: Speeding Zone", 12.0, 5.0, 500.0),
];

const ROAD_CLASSES: [(&str, u32); 4] = [
    ("Trunk", 50),
    ("Primary", 40),
    ("Secondary", 30),
    ("Motorway", 70),
];

/// Bolton town centre.
const CENTER: (f64, f64) = (53.5769, -2.4282);

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn sensor(
    rng: &mut SimpleRng,
    detid: String,
    (lat, long): (f64, f64),
    (fclass, limit): (&'static str, u32),
    (risk_label, offset, spread, flow): (&'static str, f64, f64, f64),
) -> Row {
    let avg_speed = (limit as f64 + rng.gauss(offset, spread)).max(3.0);
    Row {
        detid,
        lat,
        long,
        fclass,
        avg_speed,
        limit,
        speed_gap: avg_speed - limit as f64,
        avg_flow: rng.gauss(flow, flow * 0.25).max(20.0),
        risk_label,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let mut rows = Vec::new();

    // The incident sensor: a congested trunk link with its primary neighbours.
    let jam = PROFILES[1];
    let mut root = sensor(&mut rng, "N53311D".into(), (53.5802, -2.4265), ROAD_CLASSES[0], jam);
    root.avg_speed = 21.4;
    root.speed_gap = root.avg_speed - root.limit as f64;
    root.avg_flow = 1850.0;
    rows.push(root);

    for i in 0..12 {
        let pos = (53.5802 + rng.gauss(0.0, 0.006), -2.4265 + rng.gauss(0.0, 0.009));
        rows.push(sensor(&mut rng, format!("N533{i:02}P"), pos, ROAD_CLASSES[1], jam));
    }

    for i in 0..240 {
        let pos = (CENTER.0 + rng.gauss(0.0, 0.035), CENTER.1 + rng.gauss(0.0, 0.05));
        let class = ROAD_CLASSES[rng.below(ROAD_CLASSES.len())];
        let profile = PROFILES[rng.below(PROFILES.len())];
        rows.push(sensor(&mut rng, format!("S{i:04}"), pos, class, profile));
    }

    let output_path = "bolton_risk_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    for row in &rows {
        writer.serialize(row).context("writing row")?;
    }
    writer.flush().context("flushing CSV")?;

    log::info!("wrote {} sensors", rows.len());
    println!("Wrote {} sensors to {output_path}", rows.len());
    Ok(())
}
