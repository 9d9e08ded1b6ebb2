/**
 * Galaxy initial condition generator
 */




// ============================================================================
use galaxy_ic::app::{App, DESCRIPTION, VERSION_AND_BUILD};
use galaxy_ic::catalog::Component;
use galaxy_ic::io::{self, CborSnapshot};
use galaxy_ic::traits::SnapshotWriter;




// ============================================================================
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let input = match std::env::args().nth(1) {
        Some(input) if !input.contains('=') => input,
        _ => ".".to_string(),
    };
    let patches: Vec<String> = std::env::args().skip(1).skip_while(|s| !s.contains('=')).collect();
    let outdir = if std::path::Path::new(&input).is_dir() {
        input.clone()
    } else {
        io::parent_directory(&input)
    };

    println!();
    println!("\t{}", DESCRIPTION);
    println!("\t{}", VERSION_AND_BUILD);
    println!();
    println!("\tinput ............. {}", input);
    println!("\toutput directory .. {}", outdir);
    println!();

    let app = App::from_preset_or_file(&input, &patches)?.validate()?;
    let catalog = app.run()?;

    for &component in &Component::ORDER {
        println!("\t{:<6} ............ {}", component, catalog.component(component).len());
    }
    println!();

    let writer = CborSnapshot { path: format!("{}/{}", outdir, app.config.control.output) };
    writer.write(&app.snapshot(&catalog)?)?;

    Ok(())
}
