fn main() {
    clientbook_lib::run()
}
