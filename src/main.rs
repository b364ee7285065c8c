fn main() -> Result<(), Box<dyn std::error::Error>> {
    playbot::runtime::run()
}
