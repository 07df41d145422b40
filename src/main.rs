/*
 * Amoeba Simulation
 *
 * Soft blob creatures wander around the window, rest, dodge each other and
 * flee from the pointer while a low resolution fluid grid keeps their wakes.
 *
 * Usage: amoebas [tuning.json]
 * Log output is controlled with RUST_LOG, e.g. RUST_LOG=amoebas=debug.
 */

fn main() {
    env_logger::init();

    nannou::app(amoebas::app::model)
        .update(amoebas::app::update)
        .run();
}
