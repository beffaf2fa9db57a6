#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("duct_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use duct_engine::build::{BuildOutput, Session};
    use duct_engine::export::{PartSnapshot, restore_parameters};
    use duct_engine::geom::GeomMesh;
    use duct_engine::params::ParamValue;
    use duct_engine::parts::PartKind;
    use duct_engine::trace::RecordingSink;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"duct_cli (duct-engine)

USAGE:
  duct_cli list
  duct_cli run <part> [options]
  duct_cli restore <snapshot.json> [options]

OPTIONS:
  --set <key=value>  Set a parameter (number, true/false or #rrggbb); repeatable
  --no-gauge         Keep the manual thickness instead of selecting a gauge
  --obj <path>       Write shells and flanges as Wavefront OBJ
  --json <path>      Write the export snapshot (printed to stdout otherwise)
  --overwrite        Overwrite existing output files
  -v, --verbose      Print build diagnostics
  -h, --help         Show this help
"#;

    #[derive(Debug, Default)]
    struct Options {
        sets: Vec<(String, ParamValue)>,
        no_gauge: bool,
        obj_path: Option<PathBuf>,
        json_path: Option<PathBuf>,
        overwrite: bool,
        verbose: bool,
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_parts();
                Ok(())
            }
            "run" => {
                let part = args.next().ok_or("missing part name")?;
                let options = parse_options(&mut args)?;
                let mut session = Session::new();
                session.load_part(&part).map_err(|e| e.to_string())?;
                build_and_write(&mut session, &options)
            }
            "restore" => {
                let path = PathBuf::from(args.next().ok_or("missing snapshot path")?);
                let options = parse_options(&mut args)?;
                let text = fs::read_to_string(&path).map_err(|e| format!("read {}: {e}", path.display()))?;
                let snapshot = PartSnapshot::from_json(&text).map_err(|e| e.to_string())?;
                let (kind, params) = restore_parameters(&snapshot).map_err(|e| e.to_string())?;

                let mut session = Session::new();
                let mut sink = RecordingSink::new();
                let restored = session.restore(kind, params, &mut sink).map(|_| ()).map_err(|e| e.to_string());
                if options.verbose {
                    print_events(&sink);
                }
                restored?;
                build_and_write(&mut session, &options)
            }
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_parts() {
        for kind in PartKind::ALL {
            println!("{kind}");
        }
    }

    fn parse_options(args: &mut Args) -> Result<Options, String> {
        let mut options = Options::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--set" => options.sets.push(parse_assignment(&args.value("--set")?)?),
                "--no-gauge" => options.no_gauge = true,
                "--obj" => options.obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--json" => options.json_path = Some(PathBuf::from(args.value("--json")?)),
                "--overwrite" => options.overwrite = true,
                "-v" | "--verbose" => options.verbose = true,
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }
        Ok(options)
    }

    fn parse_assignment(text: &str) -> Result<(String, ParamValue), String> {
        let (key, raw) = text
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got `{text}`"))?;
        let raw = raw.trim();
        let value = match raw {
            "true" => ParamValue::Bool(true),
            "false" => ParamValue::Bool(false),
            _ if raw.starts_with('#') => ParamValue::color(raw),
            _ => ParamValue::Number(
                raw.parse::<f64>()
                    .map_err(|e| format!("invalid value for `{key}`: {e}"))?,
            ),
        };
        Ok((key.trim().to_owned(), value))
    }

    fn build_and_write(session: &mut Session, options: &Options) -> Result<(), String> {
        let mut sink = RecordingSink::new();
        for (key, value) in &options.sets {
            session
                .set_parameter(key, value.clone(), &mut sink)
                .map_err(|e| e.to_string())?;
        }
        if options.no_gauge {
            let mut gauge = session.parameters().gauge.clone();
            gauge.enabled = false;
            session.set_gauge(gauge);
        }

        let result = session.rebuild(&mut sink).map(|_| ()).map_err(|e| e.to_string());
        if options.verbose {
            print_events(&sink);
        }
        result?;

        let output = session.output().ok_or("no build output")?;
        let snapshot = PartSnapshot::capture(output, session.parameters());
        let json = snapshot.to_json().map_err(|e| e.to_string())?;
        if let Some(path) = options.json_path.as_deref() {
            write_text_file(path, &json, options.overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            println!("{json}");
        }

        if let Some(path) = options.obj_path.as_deref() {
            write_obj_file(path, output, options.overwrite)?;
            eprintln!("wrote {}", path.display());
        }

        eprintln!(
            "{}: triangles={} outer={:.4} m² | {}",
            output.kind,
            output.triangle_count(),
            output.area.outer_m2(),
            output.diagnostics.summary()
        );
        if let Some(timing) = output.timing.as_ref() {
            eprintln!("{}: {:.3} ms", output.kind, timing.total_ms());
        }
        Ok(())
    }

    fn print_events(sink: &RecordingSink) {
        for event in &sink.events {
            eprintln!("{event}");
        }
    }

    fn check_target(path: &Path, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        check_target(path, overwrite)?;
        let text = if text.ends_with('\n') { text.to_owned() } else { format!("{text}\n") };
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, output: &BuildOutput, overwrite: bool) -> Result<(), String> {
        check_target(path, overwrite)?;
        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        writeln!(w, "# duct-engine duct_cli").map_err(|e| format!("write obj: {e}"))?;
        let shells = output.geometry.shells.iter().map(|s| &s.mesh);
        let flanges = output.geometry.flanges.iter().map(|f| &f.mesh);
        let named = shells
            .enumerate()
            .map(|(i, mesh)| (format!("shell_{i}"), mesh))
            .chain(flanges.enumerate().map(|(i, mesh)| (format!("flange_{i}"), mesh)));

        // OBJ indices are global and 1-based.
        let mut base = 1_u32;
        for (name, mesh) in named {
            write_obj_object(&mut w, &name, mesh, base).map_err(|e| format!("write obj: {e}"))?;
            let count = u32::try_from(mesh.vertex_count()).map_err(|_| "mesh too large for OBJ".to_string())?;
            base += count;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn write_obj_object(w: &mut impl Write, name: &str, mesh: &GeomMesh, base: u32) -> std::io::Result<()> {
        writeln!(w, "o {name}")?;
        for p in mesh.positions.iter().copied() {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let a = tri[0] + base;
            let b = tri[1] + base;
            let c = tri[2] + base;
            writeln!(w, "f {a} {b} {c}")?;
        }
        Ok(())
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
