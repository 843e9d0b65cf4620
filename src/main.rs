fn main() {
    takecut_lib::run()
}
