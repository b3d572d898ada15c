fn main() {
    if let Err(e) = care_roster_lib::run() {
        eprintln!("care-roster: {e}");
        std::process::exit(1);
    }
}
