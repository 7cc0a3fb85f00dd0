//! The fixed canonical catalog of the 66 books.

pub const BOOK_COUNT: u8 = 66;
/// Last book of the Old Testament (Malachi).
pub const LAST_OLD_TESTAMENT_BOOK: u8 = 39;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Testament {
    Old,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    pub number: u8,
    pub name: &'static str,
    pub abbrev: &'static str,
}

impl Book {
    const fn new(number: u8, name: &'static str, abbrev: &'static str) -> Self {
        Self {
            number,
            name,
            abbrev,
        }
    }

    pub fn testament(&self) -> Testament {
        testament_of(self.number)
    }

    /// Name used in chapter headings ("Psalm 23", not "Psalms 23").
    pub fn display_name(&self) -> &'static str {
        if self.name == "Psalms" {
            "Psalm"
        } else {
            self.name
        }
    }

    /// Lowercase, dash-separated form used in text file names ("1-samuel").
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }
}

static BOOKS: [Book; BOOK_COUNT as usize] = [
    Book::new(1, "Genesis", "Gen"),
    Book::new(2, "Exodus", "Exod"),
    Book::new(3, "Leviticus", "Lev"),
    Book::new(4, "Numbers", "Num"),
    Book::new(5, "Deuteronomy", "Deut"),
    Book::new(6, "Joshua", "Josh"),
    Book::new(7, "Judges", "Judg"),
    Book::new(8, "Ruth", "Ruth"),
    Book::new(9, "1 Samuel", "1Sam"),
    Book::new(10, "2 Samuel", "2Sam"),
    Book::new(11, "1 Kings", "1Kgs"),
    Book::new(12, "2 Kings", "2Kgs"),
    Book::new(13, "1 Chronicles", "1Chr"),
    Book::new(14, "2 Chronicles", "2Chr"),
    Book::new(15, "Ezra", "Ezra"),
    Book::new(16, "Nehemiah", "Neh"),
    Book::new(17, "Esther", "Esth"),
    Book::new(18, "Job", "Job"),
    Book::new(19, "Psalms", "Ps"),
    Book::new(20, "Proverbs", "Prov"),
    Book::new(21, "Ecclesiastes", "Eccl"),
    Book::new(22, "Song of Solomon", "Song"),
    Book::new(23, "Isaiah", "Isa"),
    Book::new(24, "Jeremiah", "Jer"),
    Book::new(25, "Lamentations", "Lam"),
    Book::new(26, "Ezekiel", "Ezek"),
    Book::new(27, "Daniel", "Dan"),
    Book::new(28, "Hosea", "Hos"),
    Book::new(29, "Joel", "Joel"),
    Book::new(30, "Amos", "Amos"),
    Book::new(31, "Obadiah", "Obad"),
    Book::new(32, "Jonah", "Jonah"),
    Book::new(33, "Micah", "Mic"),
    Book::new(34, "Nahum", "Nah"),
    Book::new(35, "Habakkuk", "Hab"),
    Book::new(36, "Zephaniah", "Zeph"),
    Book::new(37, "Haggai", "Hag"),
    Book::new(38, "Zechariah", "Zech"),
    Book::new(39, "Malachi", "Mal"),
    Book::new(40, "Matthew", "Matt"),
    Book::new(41, "Mark", "Mark"),
    Book::new(42, "Luke", "Luke"),
    Book::new(43, "John", "John"),
    Book::new(44, "Acts", "Acts"),
    Book::new(45, "Romans", "Rom"),
    Book::new(46, "1 Corinthians", "1Cor"),
    Book::new(47, "2 Corinthians", "2Cor"),
    Book::new(48, "Galatians", "Gal"),
    Book::new(49, "Ephesians", "Eph"),
    Book::new(50, "Philippians", "Phil"),
    Book::new(51, "Colossians", "Col"),
    Book::new(52, "1 Thessalonians", "1Thess"),
    Book::new(53, "2 Thessalonians", "2Thess"),
    Book::new(54, "1 Timothy", "1Tim"),
    Book::new(55, "2 Timothy", "2Tim"),
    Book::new(56, "Titus", "Titus"),
    Book::new(57, "Philemon", "Phlm"),
    Book::new(58, "Hebrews", "Heb"),
    Book::new(59, "James", "Jas"),
    Book::new(60, "1 Peter", "1Pet"),
    Book::new(61, "2 Peter", "2Pet"),
    Book::new(62, "1 John", "1John"),
    Book::new(63, "2 John", "2John"),
    Book::new(64, "3 John", "3John"),
    Book::new(65, "Jude", "Jude"),
    Book::new(66, "Revelation", "Rev"),
];

pub fn all() -> &'static [Book] {
    &BOOKS
}

pub fn is_valid_book(number: u8) -> bool {
    (1..=BOOK_COUNT).contains(&number)
}

pub fn by_number(number: u8) -> Option<&'static Book> {
    if !is_valid_book(number) {
        return None;
    }
    BOOKS.get(usize::from(number) - 1)
}

/// Case-insensitive lookup by full name or abbreviation.
pub fn by_name(name: &str) -> Option<&'static Book> {
    let needle = name.trim();
    let book = BOOKS.iter().find(|b| {
        b.name.eq_ignore_ascii_case(needle) || b.abbrev.eq_ignore_ascii_case(needle)
    });
    if book.is_none() {
        log::warn!("Book not found: {needle:?}");
    }
    book
}

pub fn testament_of(number: u8) -> Testament {
    if number <= LAST_OLD_TESTAMENT_BOOK {
        Testament::Old
    } else {
        Testament::New
    }
}
