//! Convert a HEIC file to a generic bitmap file

use heic_translator::decoder::LibHeifDecoder;
use heic_translator::{HeicTranslator, HeifDecoder, Identification, Translator, TypeCode};
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input.heic> <output.bits>", args[0]);
        process::exit(2);
    }

    if let Err(msg) = run(&args[1], &args[2]) {
        eprintln!("{msg}");
        process::exit(1);
    }
}

fn run(input_path: &str, output_path: &str) -> Result<(), String> {
    let translator = HeicTranslator::new(LibHeifDecoder::new());
    log::info!(
        "{} {} using {}",
        translator.config().name,
        translator.config().version,
        translator.decoder().version()
    );

    let mut input =
        File::open(input_path).map_err(|e| format!("Failed to open {input_path}: {e}"))?;

    match translator
        .identify(&mut input, Some(TypeCode::BITMAP))
        .map_err(|e| format!("Failed to read {input_path}: {}", e.error()))?
    {
        Identification::Accepted(format) => {
            log::info!("{input_path}: {} ({})", format.name, format.mime);
        }
        Identification::Rejected(reason) => {
            return Err(format!("{input_path}: not a HEIC image ({reason:?})"));
        }
    }

    let output =
        File::create(output_path).map_err(|e| format!("Failed to create {output_path}: {e}"))?;
    let mut out = BufWriter::new(output);
    let header = translator
        .translate(&mut input, TypeCode::HEIC, Some(TypeCode::BITMAP), &mut out)
        .map_err(|e| {
            log::debug!("{e:?}");
            format!("Translation failed ({:?}): {}", e.error().kind(), e.error())
        })?;

    println!(
        "Wrote {}x{} bitmap to {} ({} bytes of pixel data)",
        header.bounds.width(),
        header.bounds.height(),
        output_path,
        header.data_size
    );
    Ok(())
}
