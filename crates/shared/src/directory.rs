use crate::domain::DirectoryEntry;

const SAMPLE_CHURCHES: [(&str, &str); 10] = [
    ("Zetech University", "ZETU001"),
    ("Nairobi Central Church", "NCC002"),
    ("Karen Adventist Church", "KAC003"),
    ("Eastleigh SDA Church", "ESC004"),
    ("Kibera Community Church", "KCC005"),
    ("Westlands Baptist Church", "WBC006"),
    ("Kasarani Methodist Church", "KMC007"),
    ("Thika Road Chapel", "TRC008"),
    ("Langata Presbyterian", "LPC009"),
    ("Kiambu Town Church", "KTC010"),
];

/// Built-in church directory used when no other source is configured.
pub fn sample_directory() -> Vec<DirectoryEntry> {
    SAMPLE_CHURCHES
        .iter()
        .map(|(name, code)| DirectoryEntry::new(*name, *code))
        .collect()
}
