fn main() {
    #[cfg(target_arch = "wasm32")]
    raptor_frontend::run();
}
