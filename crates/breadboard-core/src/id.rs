use slotmap::new_key_type;

new_key_type! {
    /// Identifies a component (breadboard, supply, or mounted part) in a circuit.
    pub struct ComponentId;

    /// Identifies a wire in a circuit.
    pub struct WireId;
}
