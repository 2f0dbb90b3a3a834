fn main() {
    pollster::block_on(geoglobe::run());
}
