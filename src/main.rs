fn main() -> Result<(), Box<dyn std::error::Error>> {
    neon_chat::cli::main()
}
