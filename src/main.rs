fn main() {
    mplcheck::cli::run();
}
