use serde::Serialize;

/// One multiple-choice question. `explanation` is only shown after a correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub question: &'static str,
    pub options: &'static [&'static str],
    pub correct_index: usize,
    pub explanation: &'static str,
}

impl QuizQuestion {
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_index
    }
}

/// The full question bank sessions are drawn from.
pub fn catalog() -> &'static [QuizQuestion] {
    QUESTIONS
}

static QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        question: "Apa fungsi utama dari saklar listrik?",
        options: &[
            "Memutus dan menyambung arus listrik",
            "Menambah daya listrik",
            "Menyimpan energi listrik",
        ],
        correct_index: 0,
        explanation: "Saklar berfungsi untuk memutus dan menyambung aliran arus listrik dalam rangkaian.",
    },
    QuizQuestion {
        question: "Rumus untuk menghitung energi listrik (kWh) yang benar adalah:",
        options: &[
            "Energi = Tegangan × Arus",
            "Energi = (Daya × Waktu) / 1000",
            "Energi = Daya / Waktu",
        ],
        correct_index: 1,
        explanation: "Energi dalam kWh dihitung dengan rumus: (Daya dalam Watt × Waktu dalam jam) / 1000",
    },
    QuizQuestion {
        question: "Alat rumah tangga mana yang paling boros energi jika dibiarkan menyala 24 jam?",
        options: &[
            "Lampu LED 10W",
            "AC 1000W",
            "Kulkas 150W",
        ],
        correct_index: 1,
        explanation: "AC dengan daya 1000W akan mengonsumsi energi paling besar dibanding lampu LED atau kulkas.",
    },
    QuizQuestion {
        question: "Rangkaian listrik tertutup berarti:",
        options: &[
            "Ada aliran arus dari positif ke negatif",
            "Tidak ada aliran arus",
            "Hanya ada di baterai",
        ],
        correct_index: 0,
        explanation: "Rangkaian tertutup memungkinkan arus mengalir dari kutub positif ke negatif melalui komponen.",
    },
    QuizQuestion {
        question: "Cara paling efisien menggunakan kulkas adalah:",
        options: &[
            "Buka pintu selama mungkin",
            "Tutup pintu dengan cepat setelah digunakan",
            "Matikan saat tidak digunakan",
        ],
        correct_index: 1,
        explanation: "Menutup pintu kulkas dengan cepat mencegah udara dingin keluar dan mengurangi konsumsi energi.",
    },
    QuizQuestion {
        question: "Lampu LED lebih hemat energi dibanding lampu pijar karena:",
        options: &[
            "Menghasilkan cahaya lebih terang",
            "Mengubah energi listrik menjadi cahaya lebih efisien",
            "Harganya lebih murah",
        ],
        correct_index: 1,
        explanation: "LED mengubah lebih banyak energi listrik menjadi cahaya dan lebih sedikit menjadi panas.",
    },
    QuizQuestion {
        question: "Satuan untuk mengukur daya listrik adalah:",
        options: &[
            "Volt",
            "Watt",
            "Ampere",
        ],
        correct_index: 1,
        explanation: "Watt adalah satuan untuk mengukur daya listrik, sedangkan Volt untuk tegangan dan Ampere untuk arus.",
    },
    QuizQuestion {
        question: "Memanfaatkan cahaya matahari di siang hari dapat mengurangi penggunaan:",
        options: &[
            "AC",
            "Kulkas",
            "Lampu",
        ],
        correct_index: 2,
        explanation: "Cahaya alami dari matahari dapat menggantikan lampu di siang hari untuk menghemat energi.",
    },
    QuizQuestion {
        question: "Mode hemat energi pada rice cooker berfungsi untuk:",
        options: &[
            "Memasak lebih cepat",
            "Mengurangi konsumsi daya saat memanaskan",
            "Menambah porsi nasi",
        ],
        correct_index: 1,
        explanation: "Mode hemat energi mengurangi daya yang digunakan untuk menjaga nasi tetap hangat.",
    },
    QuizQuestion {
        question: "Jika tagihan listrik rumah melebihi target, hal yang harus dilakukan adalah:",
        options: &[
            "Biarkan saja",
            "Matikan perangkat yang tidak digunakan",
            "Tambah daya listrik",
        ],
        correct_index: 1,
        explanation: "Mematikan perangkat yang tidak perlu adalah cara efektif mengurangi konsumsi dan tagihan listrik.",
    },
    QuizQuestion {
        question: "Komponen yang menyimpan energi listrik dalam rangkaian adalah:",
        options: &[
            "Baterai",
            "Saklar",
            "Lampu",
        ],
        correct_index: 0,
        explanation: "Baterai menyimpan energi kimia dan mengubahnya menjadi energi listrik.",
    },
    QuizQuestion {
        question: "Penggunaan setrika yang efisien adalah:",
        options: &[
            "Nyalakan sepanjang hari",
            "Gunakan hanya saat diperlukan",
            "Gunakan dengan daya maksimal terus-menerus",
        ],
        correct_index: 1,
        explanation: "Setrika harus digunakan hanya saat diperlukan untuk menghemat energi.",
    },
    QuizQuestion {
        question: "Alat pengukur konsumsi energi listrik di rumah adalah:",
        options: &[
            "Termometer",
            "kWh meter",
            "Voltmeter",
        ],
        correct_index: 1,
        explanation: "kWh meter mengukur total energi listrik yang dikonsumsi dalam kilowatt-hour.",
    },
    QuizQuestion {
        question: "Tarif listrik biasanya dihitung per:",
        options: &[
            "kWh (kilowatt-hour)",
            "Watt",
            "Volt",
        ],
        correct_index: 0,
        explanation: "Tagihan listrik dihitung berdasarkan konsumsi energi dalam satuan kWh.",
    },
    QuizQuestion {
        question: "Mengapa penting menghemat energi listrik?",
        options: &[
            "Hanya untuk menghemat uang",
            "Untuk menjaga lingkungan dan mengurangi emisi",
            "Tidak penting",
        ],
        correct_index: 1,
        explanation: "Menghemat listrik membantu mengurangi emisi karbon dan menjaga keberlanjutan lingkungan.",
    },
    QuizQuestion {
        question: "Rangkaian seri berbeda dengan paralel karena:",
        options: &[
            "Arus mengalir melalui satu jalur",
            "Tegangan sama di semua komponen",
            "Lebih hemat energi",
        ],
        correct_index: 0,
        explanation: "Dalam rangkaian seri, arus mengalir melalui satu jalur melewati semua komponen.",
    },
    QuizQuestion {
        question: "Jika satu lampu mati dalam rangkaian seri, yang terjadi adalah:",
        options: &[
            "Semua lampu mati",
            "Lampu lain tetap menyala",
            "Lampu menjadi lebih terang",
        ],
        correct_index: 0,
        explanation: "Dalam rangkaian seri, jika satu komponen mati, seluruh rangkaian terputus.",
    },
    QuizQuestion {
        question: "Perangkat elektronik dalam mode standby tetap mengonsumsi energi:",
        options: &[
            "Benar",
            "Salah",
            "Hanya pada TV",
        ],
        correct_index: 0,
        explanation: "Mode standby tetap menggunakan daya listrik meskipun kecil, yang disebut vampire power.",
    },
    QuizQuestion {
        question: "Cara terbaik menggunakan kipas angin untuk efisiensi energi:",
        options: &[
            "Nyalakan di semua ruangan",
            "Gunakan hanya di ruangan yang ditempati",
            "Nyalakan 24 jam",
        ],
        correct_index: 1,
        explanation: "Kipas hanya efektif jika ada orang di ruangan tersebut, jadi gunakan hanya saat diperlukan.",
    },
    QuizQuestion {
        question: "Target tagihan listrik yang efisien untuk laboratorium dalam game ini adalah:",
        options: &[
            "≤ Rp 300.000",
            "≥ Rp 500.000",
            "Tidak ada target",
        ],
        correct_index: 0,
        explanation: "Dalam Level 3, target efisiensi adalah menjaga tagihan tetap di bawah atau sama dengan Rp 300.000.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_enough_questions_for_a_session() {
        assert!(catalog().len() >= 10);
    }

    #[test]
    fn every_question_is_well_formed() {
        for q in catalog() {
            assert!(!q.question.is_empty());
            assert!(
                (2..=3).contains(&q.options.len()),
                "question {:?} has {} options",
                q.question,
                q.options.len()
            );
            assert!(q.correct_index < q.options.len());
            assert!(!q.explanation.is_empty());
        }
    }

    #[test]
    fn question_texts_are_unique() {
        let texts: HashSet<_> = catalog().iter().map(|q| q.question).collect();
        assert_eq!(texts.len(), catalog().len());
    }

    #[test]
    fn is_correct_checks_index() {
        let q = &catalog()[1];
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert!(!q.is_correct(7));
    }
}
