fn main() {
    airflick_lib::run()
}
