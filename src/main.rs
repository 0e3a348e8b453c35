mod cmd;

fn main() {
    env_logger::init();
    cmd::run();
}
