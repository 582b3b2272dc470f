pub mod filament_examples;
