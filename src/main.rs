fn main() {
    if let Err(err) = gantt_svg::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
