use canyon_sim_core::emissions::factors::rates_from_traffic;
use canyon_sim_core::model::{nan_field, run_assessment, WindProfileConfig};
use canyon_sim_core::{
    Barrier, BarrierProfile, CrossSection, EmissionZones, ExistingBarrier, Pollutant,
    PollutantLoad, SectorClimatology, Span,
};
use clap::Parser;

/// Street-canyon barrier assessment demo with configurable geometry
#[derive(Parser, Debug)]
#[command(name = "canyon-demo")]
#[command(about = "Street canyon air quality barrier assessment", long_about = None)]
struct Args {
    /// Left building height in m
    #[arg(long, default_value_t = 18.0)]
    left_building: f64,

    /// Right building height in m
    #[arg(long, default_value_t = 18.0)]
    right_building: f64,

    /// Road width in m
    #[arg(short, long, default_value_t = 36.0)]
    road_width: f64,

    /// Left street boundary (footway edge) in m
    #[arg(long, default_value_t = 6.0)]
    left_boundary: f64,

    /// Right street boundary in m
    #[arg(long, default_value_t = 30.0)]
    right_boundary: f64,

    /// Emission zone start in m
    #[arg(long, default_value_t = 10.0)]
    zone_start: f64,

    /// Emission zone end in m
    #[arg(long, default_value_t = 26.0)]
    zone_end: f64,

    /// Traffic flow in vehicles per hour (converted via fleet factors)
    #[arg(short, long, default_value_t = 1200.0)]
    traffic: f64,

    /// NO2 background concentration in ug/m3
    #[arg(long, default_value_t = 40.0)]
    no2_background: f64,

    /// PM2.5 background concentration in ug/m3
    #[arg(long, default_value_t = 16.0)]
    pm25_background: f64,

    /// Proposed barrier position in m (omit for no barrier)
    #[arg(long)]
    barrier_position: Option<f64>,

    /// Proposed barrier height in m
    #[arg(long, default_value_t = 2.0)]
    barrier_height: f64,

    /// Proposed barrier obstruction in percent
    #[arg(long, default_value_t = 75.0)]
    barrier_obstruction: f64,

    /// Existing left barrier as "position,height,obstruction_percent"
    #[arg(long)]
    existing_left: Option<String>,

    /// Existing right barrier as "position,height,obstruction_percent"
    #[arg(long)]
    existing_right: Option<String>,

    /// Cross-canyon wind speed left-to-right in m/s
    #[arg(long, default_value_t = 4.65)]
    wind_lr: f64,

    /// Cross-canyon wind speed right-to-left in m/s
    #[arg(long, default_value_t = 4.65)]
    wind_rl: f64,

    /// Frequency of left-to-right wind (fraction)
    #[arg(long, default_value_t = 0.4)]
    freq_lr: f64,

    /// Frequency of right-to-left wind (fraction)
    #[arg(long, default_value_t = 0.3)]
    freq_rl: f64,

    /// Wind profile preset (open-terrain, wind-tunnel, kerbside)
    #[arg(short, long, default_value = "open-terrain")]
    preset: String,

    /// Emit the result as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_existing(spec: &str) -> Result<ExistingBarrier, String> {
    let parts: Vec<&str> = spec.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected position,height,obstruction_percent: {spec}"));
    }
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|e| format!("{s}: {e}"));
    Ok(ExistingBarrier {
        position: parse(parts[0])?,
        height: parse(parts[1])?,
        obstruction: parse(parts[2])? / 100.0,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let existing_left = args.existing_left.as_deref().map(|s| match parse_existing(s) {
        Ok(barrier) => barrier,
        Err(e) => {
            eprintln!("bad --existing-left: {e}");
            std::process::exit(2);
        }
    });
    let existing_right = args.existing_right.as_deref().map(|s| match parse_existing(s) {
        Ok(barrier) => barrier,
        Err(e) => {
            eprintln!("bad --existing-right: {e}");
            std::process::exit(2);
        }
    });

    let new_barrier = args.barrier_position.map(|position| Barrier {
        position,
        profile: BarrierProfile::Hedge {
            height: args.barrier_height,
            obstruction: args.barrier_obstruction / 100.0,
        },
    });

    let section = CrossSection {
        left_building_height: args.left_building,
        right_building_height: args.right_building,
        road_width: args.road_width,
        left_boundary: args.left_boundary,
        right_boundary: args.right_boundary,
        emission_zones: EmissionZones::single(Span::new(args.zone_start, args.zone_end)),
        existing_left,
        existing_right,
        new_barrier,
    };

    let parallel = (1.0 - args.freq_lr - args.freq_rl) / 2.0;
    let climatology = SectorClimatology::from_sectors(
        args.wind_lr,
        args.wind_rl,
        args.freq_lr,
        args.freq_rl,
        parallel,
        parallel,
    );

    let rates = rates_from_traffic(args.traffic);
    let pollutants = vec![
        PollutantLoad {
            pollutant: Pollutant::No2,
            background: args.no2_background,
            primary_emission: rates.no2,
            secondary_emission: 0.0,
        },
        PollutantLoad {
            pollutant: Pollutant::Pm25,
            background: args.pm25_background,
            primary_emission: rates.pm25,
            secondary_emission: 0.0,
        },
    ];

    let config = match args.preset.as_str() {
        "open-terrain" => WindProfileConfig::open_terrain(),
        "wind-tunnel" => WindProfileConfig::wind_tunnel(args.wind_lr),
        "kerbside" => WindProfileConfig::kerbside(),
        other => {
            eprintln!("unknown preset: {other}");
            std::process::exit(2);
        }
    };

    match run_assessment(&section, &climatology, &pollutants, &config) {
        Ok(assessment) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&assessment).expect("assessment serializes")
                );
                return;
            }
            println!("rows (m):    {:?}", &assessment.row_edges[1..]);
            println!("columns (m): {:?}", &assessment.forward_column_edges[1..]);
            for result in &assessment.pollutants {
                println!("\n{} weighted % change (top row first):", result.pollutant.label());
                let intervals = result.percent_change.column_edges.len() - 1;
                for row in (0..3).rev() {
                    let slice =
                        &result.percent_change.values[row * intervals..(row + 1) * intervals];
                    let cells: Vec<String> = slice.iter().map(|v| format!("{v:+7.2}")).collect();
                    println!("  {}", cells.join(" "));
                }
            }
        }
        Err(error) => {
            eprintln!("assessment failed: {error}");
            eprintln!("field: {:?}", nan_field());
            std::process::exit(1);
        }
    }
}
